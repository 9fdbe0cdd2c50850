#![allow(dead_code)]

use wvs_align::align::QuestionMapping;
use wvs_align::questions::QuestionRecord;

pub const ENGLISH_SAMPLE: &str = "WORLD VALUES SURVEY\n\
Strongly agree Agree Disagree Strongly disagree\n\
Q1. Work is a duty towards society.\n\
1 2 3 4\n\
Q2. People who do not work turn lazy.\n\
1 2 3 4 -1\n";

pub const TURKISH_SAMPLE: &str = "DÜNYA DEĞERLER ARAŞTIRMASI\n\
Kesinlikle Katılırım Katılırım Katılmam Kesinlikle Katılmam\n\
Q1. Çalışmak topluma karşı bir görevdir.\n\
1 2 3 4\n\
Q2. Çalışmayan insanlar tembelleşir.\n\
1 2 3 4 -1 -2\n\
Q3. Ek soru.\n\
1 2\n";

pub const SHOW_CARD_SAMPLE: &str = "Front\n\
Q1. How important is family? SHOW_CARD_1\n\
1 2\n\
SHOW CARD A\n\
Very important\n\
Rather important\n\
Q2. Next question\n\
1 2\n";

pub fn record(id: &str, text: &str, options: &[&str], show_card: Option<&str>) -> QuestionRecord {
    QuestionRecord {
        question_id: id.to_string(),
        question_text: text.to_string(),
        response_options: options.iter().map(|o| o.to_string()).collect(),
        show_card: show_card.map(str::to_string),
    }
}

pub fn mapping(turkish: QuestionRecord, english: QuestionRecord) -> QuestionMapping {
    QuestionMapping { turkish, english }
}

/// A mapping whose English side is the given question, with a matching Turkish side.
pub fn english_mapping(id: &str, text: &str, options: &[&str]) -> QuestionMapping {
    mapping(
        record(id, &format!("{text} (tr)"), options, None),
        record(id, text, options, None),
    )
}
