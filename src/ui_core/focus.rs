//! Modal focus trap.

/// Where focus should wrap to when Tab is pressed inside a modal.
///
/// `count` is the number of enabled focusable descendants, `current` the
/// index of the focused one (if focus is inside at all). Returns `Some(i)`
/// only when focus must wrap (Shift+Tab on the first element, Tab on the
/// last); otherwise the browser's native order applies.
pub fn trap_focus(count: usize, current: Option<usize>, shift: bool) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let last = count - 1;
    match (shift, current) {
        (true, Some(0)) => Some(last),
        (false, Some(i)) if i == last => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_at_edges() {
        assert_eq!(trap_focus(3, Some(2), false), Some(0));
        assert_eq!(trap_focus(3, Some(0), true), Some(2));
    }

    #[test]
    fn test_native_order_in_the_middle() {
        assert_eq!(trap_focus(3, Some(1), false), None);
        assert_eq!(trap_focus(3, Some(1), true), None);
        assert_eq!(trap_focus(3, Some(0), false), None);
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(trap_focus(1, Some(0), false), Some(0));
        assert_eq!(trap_focus(1, Some(0), true), Some(0));
        assert_eq!(trap_focus(0, None, false), None);
        assert_eq!(trap_focus(3, None, false), None);
    }
}
