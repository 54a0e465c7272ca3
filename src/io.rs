use crate::model::{
    Appointment, Area, CapacityBucket, CareFunction, Caregiver, DutyType, Plan, VisitType,
};
use anyhow::{bail, Context};
use chrono::Weekday;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Import de soignants depuis CSV :
/// header `handle,display_name,function,area,percent[,limits]`,
/// `limits` au format `bucket=4;bucket=2`.
pub fn import_caregivers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Caregiver>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let display = rec.get(1).context("missing display_name")?.trim();
        if handle.is_empty() || display.is_empty() {
            bail!("invalid caregiver row (empty)");
        }
        let function = parse_function(rec.get(2).context("missing function")?.trim())
            .with_context(|| format!("invalid function for handle {handle}"))?;
        let area = parse_area(rec.get(3).context("missing area")?.trim())
            .with_context(|| format!("invalid area for handle {handle}"))?;
        let mut caregiver = Caregiver::new(handle.to_string(), display.to_string(), function, area);
        if let Some(percent) = rec.get(4) {
            let percent = percent.trim();
            if !percent.is_empty() {
                caregiver.work_hours_percent = percent
                    .parse()
                    .with_context(|| format!("invalid percent for handle {handle}"))?;
            }
        }
        if let Some(limits) = rec.get(5) {
            let limits = limits.trim();
            if !limits.is_empty() {
                caregiver.duty_limits = parse_limits(limits)
                    .with_context(|| format!("invalid limits for handle {handle}"))?;
            }
        }
        out.push(caregiver);
    }
    Ok(out)
}

/// Import de rendez-vous :
/// header `patient,weekday,visit_type,duration_minutes,owner_handle`.
/// Le propriétaire est résolu sur les soignants déjà présents du plan.
pub fn import_appointments_csv<P: AsRef<Path>>(
    path: P,
    plan: &Plan,
) -> anyhow::Result<Vec<Appointment>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let patient = rec.get(0).context("missing patient")?.trim().to_string();
        let weekday = parse_weekday(rec.get(1).context("missing weekday")?.trim())?;
        let visit_type = parse_visit_type(rec.get(2).context("missing visit_type")?.trim())?;
        let duration: u32 = rec
            .get(3)
            .context("missing duration_minutes")?
            .trim()
            .parse()
            .context("invalid duration_minutes")?;
        let owner_handle = rec.get(4).context("missing owner_handle")?.trim();
        let owner = plan
            .find_caregiver_by_handle(owner_handle)
            .with_context(|| format!("unknown owner handle: {owner_handle}"))?;
        let appointment =
            Appointment::new(patient, weekday, visit_type, duration, owner.id.clone())
                .map_err(anyhow::Error::msg)?;
        out.push(appointment);
    }
    Ok(out)
}

pub fn parse_function(s: &str) -> anyhow::Result<CareFunction> {
    match s.to_ascii_lowercase().as_str() {
        "nursing" => Ok(CareFunction::Nursing),
        "doctor" => Ok(CareFunction::Doctor),
        "pdl" => Ok(CareFunction::Pdl),
        "physio" => Ok(CareFunction::Physio),
        _ => bail!("expected nursing|doctor|pdl|physio, got {s}"),
    }
}

pub fn parse_area(s: &str) -> anyhow::Result<Area> {
    match s.to_ascii_lowercase().as_str() {
        "north" | "nord" => Ok(Area::North),
        "south" | "sud" => Ok(Area::South),
        "mixed" => Ok(Area::Mixed),
        _ => bail!("expected north|south|mixed, got {s}"),
    }
}

pub fn parse_duty_type(s: &str) -> anyhow::Result<DutyType> {
    match s.to_ascii_lowercase().as_str() {
        "aw_nursing" => Ok(DutyType::AwNursing),
        "rb_nursing_weekend_day" => Ok(DutyType::RbNursingWeekendDay),
        "rb_nursing_weekend_night" => Ok(DutyType::RbNursingWeekendNight),
        "rb_doctor" => Ok(DutyType::RbDoctor),
        _ => bail!("unknown duty type: {s}"),
    }
}

pub fn parse_bucket(s: &str) -> anyhow::Result<CapacityBucket> {
    match s.to_ascii_lowercase().as_str() {
        "aw_nursing" => Ok(CapacityBucket::AwNursing),
        "rb_nursing_weekend" => Ok(CapacityBucket::RbNursingWeekend),
        "rb_doctor" => Ok(CapacityBucket::RbDoctor),
        _ => bail!("unknown capacity bucket: {s}"),
    }
}

pub fn parse_visit_type(s: &str) -> anyhow::Result<VisitType> {
    match s.to_ascii_lowercase().as_str() {
        "home_visit" => Ok(VisitType::HomeVisit),
        "phone_contact" => Ok(VisitType::PhoneContact),
        "new_admission" => Ok(VisitType::NewAdmission),
        "" | "none" => Ok(VisitType::Unspecified),
        _ => bail!("unknown visit type: {s}"),
    }
}

pub fn parse_weekday(s: &str) -> anyhow::Result<Weekday> {
    s.parse::<Weekday>()
        .map_err(|_| anyhow::anyhow!("invalid weekday: {s}"))
}

fn parse_limits(raw: &str) -> anyhow::Result<BTreeMap<CapacityBucket, u32>> {
    let mut out = BTreeMap::new();
    for chunk in raw.split(';').filter(|c| !c.trim().is_empty()) {
        let (bucket, limit) = chunk
            .trim()
            .split_once('=')
            .with_context(|| format!("expected bucket=limit, got {chunk}"))?;
        let bucket = parse_bucket(bucket.trim())?;
        let limit: u32 = limit.trim().parse().context("invalid limit")?;
        out.insert(bucket, limit);
    }
    Ok(out)
}

/// Export JSON du plan (jolie mise en forme)
pub fn export_plan_json<P: AsRef<Path>>(path: P, plan: &Plan) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(plan)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des astreintes :
/// header `slot_id,date,duty_type,area,assigned_handle`
pub fn export_duty_csv<P: AsRef<Path>>(path: P, plan: &Plan) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["slot_id", "date", "duty_type", "area", "assigned_handle"])?;
    for s in &plan.duty_slots {
        let assigned = s
            .assigned
            .as_ref()
            .and_then(|cid| plan.find_caregiver_by_id(cid))
            .map(|c| c.handle.as_str())
            .unwrap_or("");
        let date = s.date.to_string();
        w.write_record([
            s.id.as_str(),
            date.as_str(),
            s.duty_type.as_str(),
            s.area.as_str(),
            assigned,
        ])?;
    }
    w.flush()?;
    Ok(())
}
