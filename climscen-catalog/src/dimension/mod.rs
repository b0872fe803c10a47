//! The seven selection dimensions

pub mod delta;
pub mod hor;
pub mod rcp;
pub mod sim;
pub mod stat;
pub mod var_idx;
pub mod view;

pub use delta::{delta_code, parse_delta, DeltaDim, DELTA_FALSE, DELTA_TRUE};
pub use hor::{HorDim, HorizonInput, HorizonSpan};
pub use rcp::{RcpCode, RcpDim, RCP_ALL, RCP_REF};
pub use sim::{SimCode, SimDim};
pub use stat::{is_stat_code, StatCode, StatDim, STAT_MAX, STAT_MEAN, STAT_MIN};
pub use var_idx::VarIdxDim;
pub use view::{Layout, ViewCode, ViewDim};
