//! 积分策略
//!
//! 返积分比例、积分有效期、到期提醒窗口和阶段阶梯都是策略常量，
//! 统一从配置加载，便于测试边界值。

use chrono::{DateTime, Duration, Utc};

use loyalty_shared::config::PolicyConfig;

use crate::error::{LoyaltyError, Result};
use crate::models::StageLadder;

/// 基点分母
const BPS_DENOMINATOR: i128 = 10_000;

/// 尾数（53 位）乘以比例（32 位）后左移不超过该位数时不会溢出 i128
const MAX_POSITIVE_EXPONENT: i32 = 40;

/// 右移超过该位数时结果必然小于 1
const MAX_NEGATIVE_EXPONENT: i32 = 100;

/// 有效期与提醒窗口的上限（天）
const MAX_WINDOW_DAYS: i64 = 36_500;

/// 积分策略
#[derive(Debug, Clone)]
pub struct LoyaltyPolicy {
    /// 消费返积分比例（基点）
    pub accrual_rate_bps: u32,
    /// 积分有效期
    pub point_validity: Duration,
    /// 到期提醒窗口
    pub expiry_notice_window: Duration,
    /// 阶段阶梯
    pub ladder: StageLadder,
}

impl Default for LoyaltyPolicy {
    fn default() -> Self {
        Self {
            accrual_rate_bps: 1000,
            point_validity: Duration::days(365),
            expiry_notice_window: Duration::days(30),
            ladder: StageLadder::default(),
        }
    }
}

impl LoyaltyPolicy {
    /// 从配置构造并校验
    pub fn from_config(config: &PolicyConfig) -> Result<Self> {
        if !(1..=MAX_WINDOW_DAYS).contains(&config.point_validity_days) {
            return Err(LoyaltyError::Validation(format!(
                "point_validity_days 必须在 1..={} 之间: {}",
                MAX_WINDOW_DAYS, config.point_validity_days
            )));
        }
        if !(0..=MAX_WINDOW_DAYS).contains(&config.expiry_notice_days) {
            return Err(LoyaltyError::Validation(format!(
                "expiry_notice_days 必须在 0..={} 之间: {}",
                MAX_WINDOW_DAYS, config.expiry_notice_days
            )));
        }

        Ok(Self {
            accrual_rate_bps: config.accrual_rate_bps,
            point_validity: Duration::days(config.point_validity_days),
            expiry_notice_window: Duration::days(config.expiry_notice_days),
            ladder: StageLadder::from_config(&config.stages)?,
        })
    }

    /// 到期提醒窗口的右边界（不含）
    pub fn notice_until(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        now.checked_add_signed(self.expiry_notice_window)
            .ok_or_else(|| {
                LoyaltyError::Validation(format!(
                    "到期提醒窗口超出范围: {}",
                    self.expiry_notice_window
                ))
            })
    }

    /// 按消费金额计算应返积分，结果向下取整
    ///
    /// 以金额浮点数的精确值做整数运算，结果等于 floor(金额 × 比例)，
    /// 不会因中间舍入多返积分
    pub fn points_for_purchase(&self, purchase_amount: f64) -> Result<i64> {
        if !purchase_amount.is_finite() {
            return Err(LoyaltyError::InvalidAmount(format!(
                "消费金额无效: {}",
                purchase_amount
            )));
        }
        if purchase_amount < 0.0 {
            return Err(LoyaltyError::InvalidAmount(format!(
                "消费金额不能为负数: {}",
                purchase_amount
            )));
        }

        let out_of_range =
            || LoyaltyError::InvalidAmount(format!("消费金额超出范围: {}", purchase_amount));

        // purchase_amount == mantissa * 2^exponent
        let (mantissa, exponent) = decode_f64(purchase_amount);
        let scaled = i128::from(mantissa) * i128::from(self.accrual_rate_bps);

        let points = if exponent >= 0 {
            if exponent > MAX_POSITIVE_EXPONENT {
                return Err(out_of_range());
            }
            (scaled << exponent) / BPS_DENOMINATOR
        } else if -exponent >= MAX_NEGATIVE_EXPONENT {
            0
        } else {
            scaled / (BPS_DENOMINATOR << -exponent)
        };

        i64::try_from(points).map_err(|_| out_of_range())
    }
}

/// 拆分非负有限浮点数为尾数和二进制指数
fn decode_f64(value: f64) -> (u64, i32) {
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);

    if exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exponent - 1075)
    }
}
