pub mod buyer_detail;
pub mod buyer_new;
pub mod buyers_list;
pub mod check_email;
pub mod import_report;
pub mod login;

pub use buyer_detail::{buyer_detail_page, BuyerDetailVm};
pub use buyer_new::new_buyer_page;
pub use buyers_list::buyers_list_page;
pub use check_email::check_email_content;
pub use import_report::import_report_page;
pub use login::login_page;
