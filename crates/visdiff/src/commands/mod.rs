mod batch;
mod compare;
mod init;
mod show;

pub use self::batch::batch;
pub use self::compare::compare;
pub use self::init::init;
pub use self::show::show;

/// Status of a single before/after comparison.
pub enum PairStatus {
    Pass { score: f64 },
    Fail { changed_pixels: u64, score: f64 },
    Missing,
    Error(String),
}
