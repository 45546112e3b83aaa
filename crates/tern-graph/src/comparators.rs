//! Orderings used to make chunk optimizations deterministic.

use std::cmp::Ordering;

use crate::module::ModuleIdentifier;

/// Case-insensitive id ordering.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

pub fn compare_numbers(a: usize, b: usize) -> Ordering {
    a.cmp(&b)
}

pub fn compare_modules_by_identifier(a: &ModuleIdentifier, b: &ModuleIdentifier) -> Ordering {
    compare_ids(a.as_str(), b.as_str())
}

/// Compare two module sequences element by element. When one sequence is a
/// prefix of the other, the shorter one sorts first.
pub fn compare_modules_by_identifier_iter<'a, A, B>(mut a: A, mut b: B) -> Ordering
where
    A: Iterator<Item = &'a ModuleIdentifier>,
    B: Iterator<Item = &'a ModuleIdentifier>,
{
    loop {
        match (a.next(), b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(item_a), Some(item_b)) => {
                let result = compare_modules_by_identifier(item_a, item_b);
                if result != Ordering::Equal {
                    return result;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<ModuleIdentifier> {
        items.iter().map(|s| ModuleIdentifier::from(*s)).collect()
    }

    #[test]
    fn test_compare_ids() {
        assert_eq!(compare_ids("abc", "def"), Ordering::Less);
        assert_eq!(compare_ids("DEF", "abc"), Ordering::Greater);
        assert_eq!(compare_ids("abc", "ABC"), Ordering::Equal);
    }

    #[test]
    fn test_compare_numbers() {
        assert_eq!(compare_numbers(1, 2), Ordering::Less);
        assert_eq!(compare_numbers(2, 1), Ordering::Greater);
        assert_eq!(compare_numbers(1, 1), Ordering::Equal);
    }

    #[test]
    fn test_compare_modules_by_identifier() {
        assert_eq!(
            compare_modules_by_identifier(&"abc".into(), &"def".into()),
            Ordering::Less
        );
        assert_eq!(
            compare_modules_by_identifier(&"DEF".into(), &"abc".into()),
            Ordering::Greater
        );
        assert_eq!(
            compare_modules_by_identifier(&"abc".into(), &"ABC".into()),
            Ordering::Equal
        );
    }

    #[test]
    fn prefix_sorts_first() {
        let short = ids(&["a", "b"]);
        let long = ids(&["a", "b", "c"]);
        assert_eq!(
            compare_modules_by_identifier_iter(short.iter(), long.iter()),
            Ordering::Less
        );
        assert_eq!(
            compare_modules_by_identifier_iter(long.iter(), short.iter()),
            Ordering::Greater
        );
        assert_eq!(
            compare_modules_by_identifier_iter(short.iter(), short.iter()),
            Ordering::Equal
        );
    }

    #[test]
    fn first_difference_decides() {
        let a = ids(&["a", "x"]);
        let b = ids(&["a", "y", "z"]);
        assert_eq!(
            compare_modules_by_identifier_iter(a.iter(), b.iter()),
            Ordering::Less
        );
    }
}
