//! Index driver implementations.

mod chart;
mod groups;
mod recent;

pub use chart::{ChartIndex, ChartQuery, ChartShape};
pub use groups::{ForeignKeyGroups, GroupResolver, Membership};
pub use recent::{RecencyIndex, DUMMY_EPSILON};
