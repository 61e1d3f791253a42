// Default scoring parameters
pub const CONTEST_BASE_WEIGHT: f64 = 100.0;
pub const CONTEST_GROWTH_PERIOD: i32 = 11;
pub const CONTEST_BONUS_TOP_N: i32 = 10;
pub const CONTEST_BONUS_MAX: f64 = 20.0;
pub const HOMEWORK_BASE_WEIGHT: f64 = 50.0;
pub const HOMEWORK_GROWTH_PERIOD: i32 = 11;
pub const HOMEWORK_BONUS_TOP_N: i32 = 5;
pub const HOMEWORK_BONUS_MAX: f64 = 10.0;
pub const UPSOLVING_POINTS_PER_PROBLEM: f64 = 5.0;
// Minimum participation for standings eligibility (0 = no minimum)
pub const MIN_CONTESTS_REQUIRED: i32 = 0;
pub const MIN_HOMEWORKS_REQUIRED: i32 = 0;
