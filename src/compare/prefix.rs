//! Common prefix helpers for path lists.

/// Length in bytes of the longest common leading substring of all `paths`.
///
/// The prefix starts as the first path and shrinks on every mismatch. An
/// empty list yields 0. The result always falls on a `char` boundary.
///
/// # Example
///
/// ```
/// use mediasync::compare::common_prefix_len;
///
/// let paths = ["/music/rock/a.mp3", "/music/rock/b.mp3", "/music/pop/c.mp3"];
/// assert_eq!(common_prefix_len(&paths), "/music/".len());
/// assert_eq!(common_prefix_len::<&str>(&[]), 0);
/// ```
#[must_use]
pub fn common_prefix_len<S: AsRef<str>>(paths: &[S]) -> usize {
    let Some((first, rest)) = paths.split_first() else {
        return 0;
    };
    let first = first.as_ref();
    let mut len = first.len();

    for path in rest {
        let path = path.as_ref();
        len = first[..len]
            .char_indices()
            .zip(path.chars())
            .find(|((_, a), b)| a != b)
            .map_or_else(|| len.min(path.len()), |((i, _), _)| i);
        if len == 0 {
            break;
        }
    }

    // A shorter path can cut a multi-byte char of `first` in half
    while !first.is_char_boundary(len) {
        len -= 1;
    }
    len
}

/// Common prefix length rounded back to just after the last `/` inside it.
///
/// Stripping this many bytes always removes whole directories, so the
/// remainder of every path keeps its file name.
///
/// # Example
///
/// ```
/// use mediasync::compare::directory_prefix_len;
///
/// let paths = ["/music/abba.mp3", "/music/abc.mp3"];
/// assert_eq!(directory_prefix_len(&paths), "/music/".len());
///
/// // A single path keeps its file name
/// assert_eq!(directory_prefix_len(&["/music/a.mp3"]), "/music/".len());
/// ```
#[must_use]
pub fn directory_prefix_len<S: AsRef<str>>(paths: &[S]) -> usize {
    let len = common_prefix_len(paths);
    match paths.first() {
        Some(first) => first.as_ref()[..len].rfind('/').map_or(0, |i| i + 1),
        None => 0,
    }
}
