use humansize::{format_size as humansize_format, BINARY};

/// 格式化字节数为友好显示格式 (例如: "1.5 KiB")
pub fn format_size(bytes: u64) -> String {
    humansize_format(bytes, BINARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1000), "1000 B");
        assert!(format_size(5 * 1024 * 1024).contains("MiB"));
    }
}
