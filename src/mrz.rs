//! TD-3 machine-readable zone location and parsing.
//!
//! A passport MRZ is two 44-character lines of `A`-`Z`, `0`-`9` and the
//! filler `<`, printed in OCR-B at the bottom of the data page. Line 1
//! carries the document type, issuing country and name; line 2 carries
//! the document number, nationality, dates, sex and personal number,
//! interleaved with 7-3-1 check digits.

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;

/// Length of each TD-3 line.
const LINE_LEN: usize = 44;
/// Filler character padding unused positions.
const FILLER: char = '<';

/// A validated pair of TD-3 lines.
///
/// Both lines are exactly 44 characters of `[A-Z0-9<]` and line 1 starts
/// with `P`. [`locate`] is the only constructor, so the fixed-offset
/// slicing in [`parse`] can rely on that invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrzLines {
    line1: String,
    line2: String,
}

impl MrzLines {
    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }
}

/// Normalize a raw recognized line: trim, drop internal spaces, uppercase,
/// and map guillemets (a common recognizer substitution for the OCR-B
/// filler) back to `<`.
fn clean_line(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|&c| c != ' ')
        .map(|c| match c {
            '\u{ab}' | '\u{bb}' => FILLER,
            _ => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Whether a cleaned line is exactly 44 characters of the MRZ alphabet.
fn is_mrz_line(line: &str) -> bool {
    line.len() == LINE_LEN && line.bytes().all(|b| matches!(b, b'A'..=b'Z' | b'0'..=b'9' | b'<'))
}

/// Scan recognized text for a TD-3 pair: among cleaned 44-character
/// candidate lines, the first consecutive pair whose first line starts
/// with `P`.
pub fn locate(text: &str) -> Option<MrzLines> {
    let candidates: Vec<String> = text
        .lines()
        .map(clean_line)
        .filter(|line| is_mrz_line(line))
        .collect();

    candidates.windows(2).find_map(|pair| {
        pair[0].starts_with('P').then(|| MrzLines {
            line1: pair[0].clone(),
            line2: pair[1].clone(),
        })
    })
}

/// ICAO 7-3-1 check digit: digits carry their value, letters carry 10-35,
/// the filler carries 0. The weighted sum is taken mod 10.
pub fn check_digit(field: &str) -> u32 {
    const WEIGHTS: [u32; 3] = [7, 3, 1];
    let sum: u32 = field
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let value = match c.to_ascii_uppercase() {
                d @ '0'..='9' => d as u32 - '0' as u32,
                a @ 'A'..='Z' => a as u32 - 'A' as u32 + 10,
                _ => 0,
            };
            value * WEIGHTS[i % 3]
        })
        .sum();
    sum % 10
}

/// Outcome of verifying the five check digits in line 2. Recorded as a
/// data quality signal; a mismatch never rejects the record, since one
/// misread digit should not discard an otherwise usable scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDigitReport {
    pub document_number: bool,
    pub date_of_birth: bool,
    pub date_of_expiry: bool,
    pub personal_number: bool,
    pub composite: bool,
}

impl CheckDigitReport {
    pub fn all_valid(&self) -> bool {
        self.document_number
            && self.date_of_birth
            && self.date_of_expiry
            && self.personal_number
            && self.composite
    }
}

/// A check digit position may hold `<` instead of `0` when its field is
/// empty.
fn digit_matches(field: &str, check: &str) -> bool {
    match check {
        "<" => check_digit(field) == 0,
        _ => check
            .parse::<u32>()
            .map(|digit| digit == check_digit(field))
            .unwrap_or(false),
    }
}

pub fn verify_check_digits(lines: &MrzLines) -> CheckDigitReport {
    let l2 = lines.line2();
    // The composite digit covers document number, birth date, expiry date
    // and personal number together with their own check digits.
    let composite_field = format!("{}{}{}", &l2[0..10], &l2[13..20], &l2[21..43]);

    CheckDigitReport {
        document_number: digit_matches(&l2[0..9], &l2[9..10]),
        date_of_birth: digit_matches(&l2[13..19], &l2[19..20]),
        date_of_expiry: digit_matches(&l2[21..27], &l2[27..28]),
        personal_number: digit_matches(&l2[28..42], &l2[42..43]),
        composite: digit_matches(&composite_field, &l2[43..44]),
    }
}

/// Sex marker at position 21 of line 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "unspecified")]
    Unspecified,
}

/// Structured identity data extracted from a TD-3 MRZ. Serialized field
/// names follow the camelCase contract of the consuming clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportRecord {
    pub surname: String,
    pub given_names: String,
    pub full_name: String,
    pub nationality: String,
    pub document_number: String,
    /// Birth date as printed, `YYMMDD`.
    pub date_of_birth: String,
    /// Expiry date as printed, `YYMMDD`.
    pub date_of_expiry: String,
    pub sex: Sex,
    /// Age in whole years, absent when the birth date cannot be read as a
    /// real calendar date or lies in the future.
    pub age: Option<u32>,
    pub issuing_country: String,
    pub personal_number: String,
}

/// Slice a validated line pair into a [`PassportRecord`].
///
/// TD-3 layout (0-indexed, end-exclusive):
/// line 1: `[0]` document type `P`, `[1]` subtype, `[2..5]` issuing
/// country, `[5..44]` names as `SURNAME<<GIVEN<NAMES<...`;
/// line 2: `[0..9]` document number, `[9]` check, `[10..13]` nationality,
/// `[13..19]` birth date, `[19]` check, `[20]` sex, `[21..27]` expiry
/// date, `[27]` check, `[28..42]` personal number, `[42]` check, `[43]`
/// composite check.
pub fn parse(lines: &MrzLines) -> PassportRecord {
    parse_with_today(lines, Utc::now().date_naive())
}

/// [`parse`] with an explicit "today" for the age derivation.
pub fn parse_with_today(lines: &MrzLines, today: NaiveDate) -> PassportRecord {
    let line1 = lines.line1();
    let line2 = lines.line2();

    let (surname, given_names) = split_name(&line1[5..44]);
    let full_name = if given_names.is_empty() {
        surname.clone()
    } else {
        format!("{given_names} {surname}")
    };

    let date_of_birth = line2[13..19].to_string();
    let sex = match line2.as_bytes()[20] {
        b'M' => Sex::Male,
        b'F' => Sex::Female,
        _ => Sex::Unspecified,
    };

    PassportRecord {
        age: calculate_age(&date_of_birth, today),
        surname,
        given_names,
        full_name,
        nationality: strip_filler(&line2[10..13]),
        document_number: strip_filler(&line2[0..9]),
        date_of_birth,
        date_of_expiry: line2[21..27].to_string(),
        sex,
        issuing_country: strip_filler(&line1[2..5]),
        personal_number: strip_filler(&line2[28..42]),
    }
}

fn strip_filler(field: &str) -> String {
    field.chars().filter(|&c| c != FILLER).collect()
}

/// Split the name field on the first `<<` into surname and given names.
/// Single fillers inside each part read as spaces.
fn split_name(field: &str) -> (String, String) {
    let (surname, given) = field.split_once("<<").unwrap_or((field, ""));
    (join_name_words(surname), join_name_words(given))
}

fn join_name_words(part: &str) -> String {
    part.split(FILLER)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Age in whole years from a `YYMMDD` date.
///
/// The century heuristic maps two-digit years at or below the current one
/// to the 2000s and the rest to the 1900s. Unparseable or calendar-invalid
/// dates, and dates that would make the age negative, yield `None`.
fn calculate_age(yymmdd: &str, today: NaiveDate) -> Option<u32> {
    if yymmdd.len() != 6 || !yymmdd.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let yy: i32 = yymmdd[0..2].parse().ok()?;
    let month: u32 = yymmdd[2..4].parse().ok()?;
    let day: u32 = yymmdd[4..6].parse().ok()?;

    let current_yy = today.year() % 100;
    let year = if yy <= current_yy { 2000 + yy } else { 1900 + yy };
    let birth = NaiveDate::from_ymd_opt(year, month, day)?;

    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}
