use crate::compiler::lexer::token_kind::FluxoTokenKind;

/// Binding power of a binary operator; 0 means "not a binary operator"
pub fn get_precedence(op: FluxoTokenKind) -> i32 {
    match op {
        FluxoTokenKind::Equal => 50,
        FluxoTokenKind::PipePipe => 60,
        FluxoTokenKind::AmpAmp => 80,
        FluxoTokenKind::DoubleEqual
        | FluxoTokenKind::ExclamationEqual
        | FluxoTokenKind::GreaterThan
        | FluxoTokenKind::LessThan
        | FluxoTokenKind::GreaterThanEqual
        | FluxoTokenKind::LessThanEqual => 100,
        FluxoTokenKind::Plus | FluxoTokenKind::Minus => 200,
        FluxoTokenKind::Asterisk | FluxoTokenKind::Slash | FluxoTokenKind::Percent => 300,
        _ => 0,
    }
}

/// Operator associativity
///
/// Returns: `true` for left-associative, `false` for right-associative
pub fn get_associativity(op: FluxoTokenKind) -> bool {
    match op {
        // Assignment is right-associative
        FluxoTokenKind::Equal => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(get_precedence(FluxoTokenKind::Asterisk) > get_precedence(FluxoTokenKind::Plus));
        assert!(get_precedence(FluxoTokenKind::Plus) > get_precedence(FluxoTokenKind::LessThan));
        assert!(get_precedence(FluxoTokenKind::LessThan) > get_precedence(FluxoTokenKind::AmpAmp));
        assert!(get_precedence(FluxoTokenKind::AmpAmp) > get_precedence(FluxoTokenKind::PipePipe));
        assert_eq!(get_precedence(FluxoTokenKind::Comma), 0);
    }

    #[test]
    fn test_associativity() {
        assert!(!get_associativity(FluxoTokenKind::Equal));
        assert!(get_associativity(FluxoTokenKind::Plus));
    }
}
