/// Splits `items` into exactly `parts` contiguous groups whose sizes differ
/// by at most one; the first `len % parts` groups get the extra item.
/// A `parts` of zero is treated as one.
pub fn partition<T: Clone>(items: &[T], parts: usize) -> Vec<Vec<T>> {
    let parts = parts.max(1);
    let base = items.len() / parts;
    let extra = items.len() % parts;

    let mut groups = Vec::with_capacity(parts);
    let mut start = 0;
    for index in 0..parts {
        let size = base + usize::from(index < extra);
        groups.push(items[start..start + size].to_vec());
        start += size;
    }

    groups
}

/// Host parallelism, used as the worker count when none is configured.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
