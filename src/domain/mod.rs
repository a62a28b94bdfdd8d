pub mod card;
pub mod common;
pub mod perk;
pub mod period;

pub use card::{is_hex_color, Card, CardPatch, NewCard, DEFAULT_CARD_COLOR};
pub use common::{new_entity_id, Displayable};
pub use perk::{NewPerk, Perk, PerkPatch};
pub use period::{bucket_key, BucketKey, Cadence, CalendarMonth, MonthError, Period};
