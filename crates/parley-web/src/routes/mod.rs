mod assistant;
mod conversation;
mod health;

pub use assistant::assistant_routes;
pub use conversation::conversation_routes;
pub use health::health_routes;
