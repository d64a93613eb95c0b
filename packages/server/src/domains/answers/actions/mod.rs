pub mod ask;

pub use ask::{
    answer_from_policies, answer_from_web, answer_question, ask, ask_web, validate_question,
    AnswerError, MAX_QUESTION_LENGTH, MAX_SEARCH_RESULTS,
};
