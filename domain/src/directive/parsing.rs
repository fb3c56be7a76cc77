//! Handoff directive parsing for Chamber turns.
//!
//! These functions extract control tokens from free-form agent replies. They
//! are pure domain logic: plain, case-insensitive substring search with no
//! knowledge of the registry or the scheduler.
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `[NEXT: <name-or-id>]` | Hand the floor to the named agent |
//! | `[CONCLUDE]` / `[Concluded]` | Ask to end the session (terminator only) |

const NEXT_OPEN: &str = "[NEXT:";
const CONCLUDE_TOKENS: [&str; 2] = ["[CONCLUDE]", "[CONCLUDED]"];

/// Control directive carried by a single agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// No usable directive
    None,
    /// Hand the floor to the referenced agent (unresolved name or id)
    Handoff(String),
    /// End the session
    Conclude,
}

/// Every directive token found in a reply, before authority is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveScan {
    /// A conclusion token was present
    pub conclude: bool,
    /// Target of the first `[NEXT: ...]` token, trimmed
    pub handoff: Option<String>,
}

impl DirectiveScan {
    /// Apply speaker authority to the scan.
    ///
    /// A conclusion token only counts when the speaker is the terminator.
    /// Otherwise it is ignored and the handoff (if any) decides the turn.
    pub fn resolve(&self, speaker_is_terminator: bool) -> Directive {
        if self.conclude && speaker_is_terminator {
            return Directive::Conclude;
        }
        match &self.handoff {
            Some(target) => Directive::Handoff(target.clone()),
            None => Directive::None,
        }
    }

    /// Whether a conclusion token was present but would be ignored for this speaker.
    pub fn ignored_conclusion(&self, speaker_is_terminator: bool) -> bool {
        self.conclude && !speaker_is_terminator
    }
}

/// Scan a reply for every directive token.
///
/// ```
/// use council_domain::directive::scan_directives;
///
/// let scan = scan_directives("Good point. [next: Muse] [CONCLUDE]");
/// assert!(scan.conclude);
/// assert_eq!(scan.handoff.as_deref(), Some("Muse"));
/// ```
pub fn scan_directives(text: &str) -> DirectiveScan {
    // ASCII uppercasing keeps byte offsets aligned with `text`
    let upper = text.to_ascii_uppercase();

    let conclude = CONCLUDE_TOKENS.iter().any(|token| upper.contains(token));

    DirectiveScan {
        conclude,
        handoff: find_handoff(text, &upper),
    }
}

/// Parse a reply into a single directive, conclusion taking priority.
///
/// This ignores speaker authority; use [`DirectiveScan::resolve`] when the
/// speaker matters.
pub fn parse_directive(text: &str) -> Directive {
    scan_directives(text).resolve(true)
}

fn find_handoff(text: &str, upper: &str) -> Option<String> {
    let mut search_from = 0;
    while let Some(rel) = upper[search_from..].find(NEXT_OPEN) {
        let start = search_from + rel + NEXT_OPEN.len();
        let Some(close) = upper[start..].find(']') else {
            return None;
        };
        let target = text[start..start + close].trim();
        if !target.is_empty() {
            return Some(target.to_string());
        }
        search_from = start + close + 1;
    }
    None
}
