//! Predefined questions about an analysis
//!
//! Offered as quick picks so common questions need not be retyped.

/// Quick questions, in menu order.
pub const QUICK_QUESTIONS: [&str; 4] = [
    "What functions does api.py have?",
    "What are different classes present in api.py?",
    "How many imports are present in app.py?",
    "How many functions are related in both app.py and api.py?",
];

/// Look up a quick question by its 1-based menu number.
pub fn quick_question(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|index| QUICK_QUESTIONS.get(index))
        .copied()
}
