pub mod todos;
pub mod users;

const ACCOUNT_NOT_FOUND_MESSAGE: &str = "Oops!! We couldn't find your account";
