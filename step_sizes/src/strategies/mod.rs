mod adagrad_diagonal;
mod adagrad_full;
mod almeida;
mod alpha_bounds;
mod autostep;
mod fixed;
mod ghs;
mod inv_max_eigen;
mod mcclain;
mod rprop;
mod stc;
mod vsgd;

pub use adagrad_diagonal::AdagradDiagonal;
pub use adagrad_full::{AdagradFull, AdagradFullConfig};
pub use almeida::{Almeida, AlmeidaConfig};
pub use alpha_bounds::AlphaBounds;
pub use autostep::{Autostep, AutostepConfig};
pub use fixed::Fixed;
pub use ghs::{Ghs, GhsConfig};
pub use inv_max_eigen::{InvMaxEigen, InvMaxEigenConfig};
pub use mcclain::{McClain, McClainConfig};
pub use rprop::{RProp, RPropConfig};
pub use stc::{Stc, StcConfig};
pub use vsgd::{VSgd, VSgdConfig};
