//! 阈值预警判定
//!
//! 纯函数：读数 + 阈值配置 → 可选的预警描述。各参数的判定方式由
//! [`RULES`] 表声明，新增参数只需要增加一行规则。

use crate::models::{AlertDescriptor, AlertSeverity, ParameterType, SensorReading, ThresholdPreferences};

/// 越限检查方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundCheck {
    /// 低于下限或高于上限
    Both,
    /// 只检查上限
    UpperOnly,
}

/// 单个参数的判定规则
#[derive(Debug, Clone, Copy)]
pub struct ParameterRule {
    pub parameter: ParameterType,
    pub check: BoundCheck,
    /// 低于 `min - margin` 升级为严重，`None` 表示低侧只会是警告
    pub critical_below: Option<f64>,
    /// 高于 `max + margin` 升级为严重，`None` 表示高侧只会是警告
    pub critical_above: Option<f64>,
    pub label: &'static str,
    /// 拼接在数值后的单位（含前导空格）
    pub unit: &'static str,
}

pub const RULES: [ParameterRule; 4] = [
    ParameterRule {
        parameter: ParameterType::Temperature,
        check: BoundCheck::Both,
        critical_below: Some(2.0),
        critical_above: Some(2.0),
        label: "Temperature",
        unit: "°C",
    },
    ParameterRule {
        parameter: ParameterType::Ph,
        check: BoundCheck::Both,
        critical_below: Some(0.5),
        critical_above: Some(0.5),
        label: "pH level",
        unit: "",
    },
    ParameterRule {
        parameter: ParameterType::DissolvedOxygen,
        check: BoundCheck::Both,
        critical_below: Some(1.0),
        critical_above: None,
        label: "Dissolved oxygen",
        unit: " mg/L",
    },
    ParameterRule {
        parameter: ParameterType::Ammonia,
        check: BoundCheck::UpperOnly,
        critical_below: None,
        critical_above: Some(0.2),
        label: "Ammonia level",
        unit: " ppm",
    },
];

pub fn rule_for(parameter: ParameterType) -> Option<&'static ParameterRule> {
    RULES.iter().find(|rule| rule.parameter == parameter)
}

/// 判定一条读数，未配置阈值或规则的参数返回 `None`
pub fn evaluate(reading: &SensorReading, thresholds: &ThresholdPreferences) -> Option<AlertDescriptor> {
    evaluate_value(reading.parameter_type, reading.value, thresholds)
}

pub fn evaluate_value(
    parameter: ParameterType,
    value: f64,
    thresholds: &ThresholdPreferences,
) -> Option<AlertDescriptor> {
    let bound = thresholds.bound_for(parameter)?;
    let rule = rule_for(parameter)?;

    let below = rule.check == BoundCheck::Both && value < bound.min;
    let above = value > bound.max;
    if !below && !above {
        return None;
    }

    let (threshold_value, critical) = if below {
        (bound.min, rule.critical_below.is_some_and(|m| value < bound.min - m))
    } else {
        (bound.max, rule.critical_above.is_some_and(|m| value > bound.max + m))
    };

    let severity = if critical {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    };

    let message = match rule.check {
        BoundCheck::Both => format!(
            "{} {}{} is outside optimal range ({}-{}{})",
            rule.label, value, rule.unit, bound.min, bound.max, rule.unit
        ),
        BoundCheck::UpperOnly => format!(
            "{} {}{} exceeds maximum threshold of {}{} (optimal range {}-{}{})",
            rule.label, value, rule.unit, bound.max, rule.unit, bound.min, bound.max, rule.unit
        ),
    };

    Some(AlertDescriptor {
        parameter_type: parameter,
        severity,
        current_value: value,
        threshold_value,
        message,
    })
}
