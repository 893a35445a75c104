mod common;
mod messaging_tests;
mod template_tests;
