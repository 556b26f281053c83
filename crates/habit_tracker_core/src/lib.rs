pub mod chart;
pub mod domain;
pub mod forms;
pub mod ports;

pub use chart::ChartBounds;
pub use domain::{AuthSession, Habit, HabitEntry, SeriesPoint, User, UserCredentials};
pub use forms::{
    EntryForm, HabitForm, LoginForm, RegisterForm, ValidEntry, ValidRegistration,
    ValidationErrors,
};
pub use ports::{
    ChartRenderingService, DatabaseService, PortError, PortResult, RenderedChart,
};
