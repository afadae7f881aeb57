#[cfg(not(target_os = "linux"))]
pub fn mem_used_peak() -> Option<usize> {
    None
}

// Peak virtual memory in kB, read from /proc.
#[cfg(target_os = "linux")]
pub fn mem_used_peak() -> Option<usize> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|line| line.starts_with("VmPeak:"))?;
    let mem_kb: String = line.chars().filter(|c| c.is_ascii_digit()).collect();
    mem_kb.parse().ok()
}
