pub mod history_repo;
pub mod pending_repo;
pub mod recommendation_repo;
pub mod schedule_repo;

pub use history_repo::HistoryRepository;
pub use pending_repo::PendingRepository;
pub use recommendation_repo::RecommendationRepository;
pub use schedule_repo::ScheduleRepository;
