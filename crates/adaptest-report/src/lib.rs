//! adaptest-report: Self-contained HTML reports for sessions and simulations.

pub mod html;

pub use html::{
    generate_session_html, generate_simulation_html, write_session_html, write_simulation_html,
};
