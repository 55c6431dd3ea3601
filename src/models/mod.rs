mod application;
mod job;
mod recommendation;
mod user;

pub use application::{
    Application, ApplicationStatus, ApplicationWithJob, CreateApplication, UpdateApplicationStatus,
};
pub use job::{CreateJob, Job, JobListParams, JobListResponse, UpdateJob};
pub use recommendation::{
    RecommendationOutcome, RecommendationsResponse, RecommendedJob, UserProfile,
};
pub use user::{AuthResponse, LoginUser, RegisterUser, User, UserRole};
