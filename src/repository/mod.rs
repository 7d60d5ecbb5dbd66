mod profile;
pub use profile::ProfileRepository;

mod user;
pub use user::UserRepository;
