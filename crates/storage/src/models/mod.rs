mod event;
mod grade;
mod point_table;
mod registration;
mod score;
mod student;
mod template;

pub use event::{Comparison, Event, EventGroup, EventType, GroupGender};
pub use grade::{Class, Grade};
pub use point_table::PointTable;
pub use registration::{MAX_OPERATOR_CHARS, Registration, check_operator};
pub use score::{
    MAX_REASON_CHARS, Round, Score, VALUE_LIMIT, VALUE_SCALE, check_reason_length, check_value,
};
pub use student::{Gender, Student};
pub use template::{EVENT_TEMPLATES, EventTemplate, find_template};
