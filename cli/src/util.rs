use std::{path::PathBuf, process::exit};

pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("Failed to get current dir: {}", e);
        exit(1);
    })
}

/// Process exit status for `failures` failed tests.
pub fn exit_code(failures: usize) -> i32 {
    failures.min(255) as i32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exit_code_is_capped() {
        assert_eq!(exit_code(0), 0);
        assert_eq!(exit_code(3), 3);
        assert_eq!(exit_code(1000), 255);
    }
}
