use super::*;
use proptest::prelude::*;

#[test]
fn identifiers() {
    for ok in ["x", "_", "_private", "snake_case", "Camel9", "a1_b2"] {
        assert!(is_identifier(ok), "{ok} should be accepted");
    }
    for bad in ["", "9lives", "has-dash", "space here", "@hook", "+", "ünicode"] {
        assert!(!is_identifier(bad), "{bad} should be rejected");
    }
}

#[test]
fn hooks() {
    for ok in ["()", "+", "==", "[]=", "@to_string", "@call"] {
        assert!(is_hook(ok), "{ok} should be accepted");
    }
    for bad in ["", "@", "@9", "name", "+++", "( )", "->"] {
        assert!(!is_hook(bad), "{bad} should be rejected");
    }
}

#[test]
fn call_hook_is_a_hook() {
    assert!(SymbolPolicy::Hook.accepts(CALL_HOOK));
    assert!(!SymbolPolicy::Identifier.accepts(CALL_HOOK));
}

#[test]
fn policy_display() {
    assert_eq!(SymbolPolicy::Identifier.to_string(), "identifier");
    assert_eq!(SymbolPolicy::Hook.to_string(), "hook");
}

proptest! {
    #[test]
    fn generated_identifiers_are_accepted(name in "[A-Za-z_][A-Za-z0-9_]{0,24}") {
        prop_assert!(SymbolPolicy::Identifier.accepts(&name));
        let hook = format!("@{name}");
        prop_assert!(SymbolPolicy::Hook.accepts(&hook));
    }

    #[test]
    fn leading_digit_is_rejected(name in "[0-9][A-Za-z0-9_]{0,24}") {
        prop_assert!(!SymbolPolicy::Identifier.accepts(&name));
        prop_assert!(!SymbolPolicy::Hook.accepts(&name));
    }
}
