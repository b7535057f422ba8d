//! Body metrics calculator (BMI and BMR)

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CalculatorError {
    #[error("{0} must be a positive number")]
    NonPositive(&'static str),
}

/// WHO adult BMI bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BmiCategory::Underweight => write!(f, "Underweight"),
            BmiCategory::Normal => write!(f, "Normal"),
            BmiCategory::Overweight => write!(f, "Overweight"),
            BmiCategory::Obese => write!(f, "Obese"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BmiReport {
    pub value: f64,
    pub category: BmiCategory,
}

impl std::fmt::Display for BmiReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Your BMI is {:.2}", self.value)
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, CalculatorError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(CalculatorError::NonPositive(name))
    }
}

/// Body mass index from height in centimetres and weight in kilograms
pub fn bmi(height_cm: f64, weight_kg: f64) -> Result<BmiReport, CalculatorError> {
    let height_m = positive("height", height_cm)? / 100.0;
    let weight = positive("weight", weight_kg)?;

    let value = weight / (height_m * height_m);
    Ok(BmiReport {
        value,
        category: BmiCategory::from_value(value),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(format!("unknown sex '{}'", other)),
        }
    }
}

/// Basal metabolic rate in kcal/day (Mifflin-St Jeor)
pub fn bmr(sex: Sex, weight_kg: f64, height_cm: f64, age_years: u32) -> Result<f64, CalculatorError> {
    let weight = positive("weight", weight_kg)?;
    let height = positive("height", height_cm)?;
    if age_years == 0 {
        return Err(CalculatorError::NonPositive("age"));
    }

    let base = 10.0 * weight + 6.25 * height - 5.0 * age_years as f64;
    Ok(match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_normal() {
        let report = bmi(170.0, 70.0).unwrap();
        assert_eq!(report.to_string(), "Your BMI is 24.22");
        assert_eq!(report.category, BmiCategory::Normal);
        assert_eq!(report.category.to_string(), "Normal");
    }

    #[test]
    fn test_bmi_bands() {
        assert_eq!(bmi(180.0, 55.0).unwrap().category, BmiCategory::Underweight);
        assert_eq!(bmi(175.0, 85.0).unwrap().category, BmiCategory::Overweight);
        assert_eq!(bmi(160.0, 95.0).unwrap().category, BmiCategory::Obese);
        assert_eq!(BmiCategory::from_value(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_value(18.5), BmiCategory::Normal);
    }

    #[test]
    fn test_bmi_rejects_bad_input() {
        assert_eq!(bmi(0.0, 70.0), Err(CalculatorError::NonPositive("height")));
        assert_eq!(bmi(170.0, -1.0), Err(CalculatorError::NonPositive("weight")));
        assert!(bmi(f64::NAN, 70.0).is_err());
    }

    #[test]
    fn test_bmr() {
        // 10*70 + 6.25*170 - 5*30
        assert_eq!(bmr(Sex::Male, 70.0, 170.0, 30).unwrap(), 1617.5);
        assert_eq!(bmr(Sex::Female, 70.0, 170.0, 30).unwrap(), 1451.5);
        assert!(bmr(Sex::Female, 70.0, 170.0, 0).is_err());
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
    }
}
