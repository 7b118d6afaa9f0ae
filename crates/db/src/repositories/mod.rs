mod project_repo;
mod user_repo;

pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
