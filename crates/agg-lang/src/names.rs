/// Parse-time validation of reference names.
///
/// The parser consults this for every `event.`, `var.` and `agg.` reference
/// it builds. Empty names are rejected before the check is consulted.
pub trait NameCheck {
    fn is_known_prop(&self, _name: &str) -> bool {
        true
    }

    fn is_known_variable(&self, _name: &str) -> bool {
        true
    }

    fn is_known_aggregator(&self, _name: &str) -> bool {
        true
    }
}

/// Accepts every non-empty name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyName;

impl NameCheck for AnyName {}
