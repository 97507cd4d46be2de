/// Release name for a class file major version, `None` for versions whose
/// constant pool layout is unknown.
///
/// Major version 45 is shared by JDK 1.0.2 and 1.1 and is reported as the
/// latter.
pub fn release_name(major: u16) -> Option<String> {
    match major {
        45 => Some(String::from("1.1")),
        46..=63 => Some(format!("1.{}", major - 44)),
        _ => None,
    }
}

#[cfg(test)]
mod release_name_tests {
    use super::*;

    #[test]
    fn it_should_name_java_8() {
        assert_eq!(release_name(52).as_deref(), Some("1.8"));
    }

    #[test]
    fn it_should_cover_the_whole_table() {
        assert_eq!(release_name(45).as_deref(), Some("1.1"));
        assert_eq!(release_name(46).as_deref(), Some("1.2"));
        assert_eq!(release_name(63).as_deref(), Some("1.19"));
    }

    #[test]
    fn it_should_reject_versions_outside_the_table() {
        assert_eq!(release_name(44), None);
        assert_eq!(release_name(64), None);
        assert_eq!(release_name(255), None);
    }
}
