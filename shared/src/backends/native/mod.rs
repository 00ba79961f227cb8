mod wall_clock;

pub use wall_clock::WallClock;
