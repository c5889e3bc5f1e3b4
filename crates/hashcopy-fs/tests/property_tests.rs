use hashcopy_fs::NormalizedPath;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_normalization_has_no_backslashes(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        prop_assert!(!path.as_str().contains('\\'));
        prop_assert!(!path.as_str().starts_with("./"));
    }

    #[test]
    fn test_normalization_is_idempotent(s in "\\PC*") {
        let once = NormalizedPath::new(&s);
        let twice = NormalizedPath::new(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_join_empty_is_identity(a in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
        let p = NormalizedPath::new(&a);
        prop_assert_eq!(p.join(""), p.clone());
        prop_assert_eq!(p.join("."), p);
    }

    #[test]
    fn test_with_file_name_replaces_last_segment(
        dir in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
        name in "[a-z]{1,8}\\.[a-z]{1,3}",
        renamed in "[a-z]{1,8}-[0-9A-Z]{1,13}\\.[a-z]{1,3}",
    ) {
        let logical = NormalizedPath::new(&dir).join(&name);
        let published = logical.with_file_name(&renamed);
        prop_assert_eq!(published.parent(), logical.parent());
        prop_assert_eq!(published.file_name(), Some(renamed.as_str()));
    }
}
