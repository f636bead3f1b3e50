use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A billing period offered on the pricing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDuration {
    pub id: String,
    pub name: String,
    pub duration_in_months: u32,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub is_active: bool,
}

/// Monthly price of a plan tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayment {
    pub id: String,
    pub plan_type: String,
    pub monthly_cost: f64,
    #[serde(default)]
    pub is_active: bool,
}

/// A plan the signed-in user holds. Only the id is relied on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPlan {
    pub id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Pricing {
    pub durations: Vec<PlanDuration>,
    pub payments: Vec<PlanPayment>,
}

impl Pricing {
    pub fn active_durations(&self) -> impl Iterator<Item = &PlanDuration> {
        self.durations.iter().filter(|d| d.is_active)
    }

    pub fn active_payments(&self) -> impl Iterator<Item = &PlanPayment> {
        self.payments.iter().filter(|p| p.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inactive_entries_are_hidden() {
        let pricing = Pricing {
            durations: serde_json::from_value(json!([
                {"id": "d1", "name": "Monthly", "durationInMonths": 1, "isActive": true},
                {"id": "d2", "name": "Yearly", "durationInMonths": 12, "isActive": false}
            ]))
            .unwrap(),
            payments: serde_json::from_value(json!([
                {"id": "p1", "planType": "free", "monthlyCost": 0, "isActive": true}
            ]))
            .unwrap(),
        };

        let names: Vec<_> = pricing.active_durations().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Monthly"]);
        assert_eq!(pricing.active_payments().count(), 1);
    }
}
