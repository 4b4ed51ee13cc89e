//! 读数统计聚合

use std::collections::BTreeMap;

use crate::models::{ParameterType, SensorReading, StatBucket};

/// 按参数类型分组统计
///
/// 组内先按记录时间排序（稳定排序，同一时刻保持输入顺序），因此
/// `latest` 总是时间最晚的读数，与输入顺序无关。没有读数的参数不会出现在结果中。
pub fn aggregate(readings: &[SensorReading]) -> BTreeMap<ParameterType, StatBucket> {
    let mut groups: BTreeMap<ParameterType, Vec<&SensorReading>> = BTreeMap::new();
    for reading in readings {
        groups.entry(reading.parameter_type).or_default().push(reading);
    }

    groups
        .into_iter()
        .filter_map(|(parameter, mut group)| {
            group.sort_by_key(|r| r.recorded_at);
            bucket(&group).map(|b| (parameter, b))
        })
        .collect()
}

fn bucket(group: &[&SensorReading]) -> Option<StatBucket> {
    let first = group.first()?;
    let last = group.last()?;

    let values: Vec<f64> = group.iter().map(|r| r.value).collect();
    let count = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = values.iter().sum();
    // 浮点累加误差可能让均值略微越出 [min, max]
    let avg = (sum / count as f64).clamp(min, max);

    Some(StatBucket {
        unit: first.unit.clone(),
        count,
        min,
        max,
        avg,
        latest: last.value,
        values,
    })
}
