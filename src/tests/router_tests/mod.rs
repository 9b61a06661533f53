mod api_tests;
mod auth_flow_tests;
mod buyers_page_tests;
