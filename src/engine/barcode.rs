// ==========================================
// 仓库托盘分配跟踪系统 - 条码解码
// ==========================================
// 职责: 从扫码枪读入的条码中截取 5 位前缀
// 规则:
// - v1: 第 [8, 13) 个字符，条码至少 14 位
// - v2: 第 [n-6, n-1) 个字符，条码至少 10 位
// - 按字符计数，不做大小写/空白处理
// ==========================================

use crate::domain::types::DecoderVariant;
use crate::engine::error::{ReconcileError, ReconcileResult};

/// 前缀长度
pub const PREFIX_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarcodeDecoder {
    variant: DecoderVariant,
}

impl BarcodeDecoder {
    pub fn new(variant: DecoderVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> DecoderVariant {
        self.variant
    }

    /// 当前版本要求的最短条码长度
    pub fn min_len(&self) -> usize {
        match self.variant {
            DecoderVariant::V1 => 14,
            DecoderVariant::V2 => 10,
        }
    }

    /// 截取前缀
    pub fn decode(&self, barcode: &str) -> ReconcileResult<String> {
        let chars: Vec<char> = barcode.chars().collect();
        let n = chars.len();
        if n < self.min_len() {
            return Err(ReconcileError::InvalidBarcode {
                barcode: barcode.to_string(),
                min_len: self.min_len(),
            });
        }

        let start = match self.variant {
            DecoderVariant::V1 => 8,
            DecoderVariant::V2 => n - 6,
        };
        Ok(chars[start..start + PREFIX_LEN].iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_takes_chars_8_to_13() {
        let decoder = BarcodeDecoder::new(DecoderVariant::V1);
        assert_eq!(decoder.decode("000000001234567").unwrap(), "12345");
        assert_eq!(decoder.decode("ABCDEFGH12345X").unwrap(), "12345");
    }

    #[test]
    fn test_v2_takes_five_before_last() {
        let decoder = BarcodeDecoder::new(DecoderVariant::V2);
        assert_eq!(decoder.decode("000000001234567").unwrap(), "23456");
        assert_eq!(decoder.decode("0000123450").unwrap(), "12345");
    }

    #[test]
    fn test_short_barcode_is_rejected() {
        let v1 = BarcodeDecoder::default();
        match v1.decode("0000000012345") {
            Err(ReconcileError::InvalidBarcode { min_len, .. }) => assert_eq!(min_len, 14),
            other => panic!("unexpected: {:?}", other),
        }

        let v2 = BarcodeDecoder::new(DecoderVariant::V2);
        assert!(v2.decode("123456789").is_err());
        assert!(v2.decode("").is_err());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let decoder = BarcodeDecoder::new(DecoderVariant::V1);
        assert_eq!(decoder.decode("ĐĐĐĐĐĐĐĐ12345ĐĐ").unwrap(), "12345");
    }

    #[test]
    fn test_no_normalization() {
        let decoder = BarcodeDecoder::new(DecoderVariant::V1);
        assert_eq!(decoder.decode("00000000 abcd 99").unwrap(), " abcd");
    }
}
