pub mod input;
pub mod report_printer;

pub use input::{load_job_file, load_seed_file, parse_seed_list, parse_sweep_jobs};
pub use report_printer::{render_check_report, render_sweep_report};
