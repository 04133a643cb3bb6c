//! Hostname distance metrics used by priority-based endpoint ranking.

/// Strip a trailing `:port` suffix from a host string.
///
/// Returns the host part unchanged when there is no numeric port suffix.
pub fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !name.is_empty() && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Prefix distance between two hostnames.
///
/// Hosts that share a longer common prefix are considered closer. The
/// distance is the number of characters of the longer name that fall
/// outside the common prefix, so identical names have distance zero.
/// Ports are stripped before comparison.
pub fn hostname_prefix_distance(local: &str, remote: &str) -> usize {
    let local = strip_port(local);
    let remote = strip_port(remote);

    let common = local
        .chars()
        .zip(remote.chars())
        .take_while(|(a, b)| a == b)
        .count();

    local.chars().count().max(remote.chars().count()) - common
}

/// Levenshtein edit distance between two hostnames.
///
/// Ports are stripped before comparison.
pub fn hostname_levenshtein_distance(local: &str, remote: &str) -> usize {
    let a: Vec<char> = strip_port(local).chars().collect();
    let b: Vec<char> = strip_port(remote).chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row dynamic programming over the edit matrix.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
