#![forbid(unsafe_code)]
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use releve::{
    io,
    model::{AppointmentId, CaregiverId, SlotId},
    AutoPlanOptions, DispatchError, Dispatcher, ExistingHandling, JsonStorage, MonthRef,
    RotationSolver, Storage,
};
use std::sync::atomic::AtomicBool;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de dispatch tournées/astreintes (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de plan
    #[arg(long, global = true, default_value = "plan.json")]
    plan: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des soignants depuis un CSV
    ImportCaregivers {
        #[arg(long)]
        csv: String,
    },

    /// Importer des rendez-vous depuis un CSV
    ImportAppointments {
        #[arg(long)]
        csv: String,
    },

    /// Poser un remplacement pour un soignant et un jour de semaine
    SetReplacement {
        #[arg(long)]
        caregiver: String,
        /// "monday", "tuesday", ...
        #[arg(long)]
        weekday: String,
        #[arg(long)]
        with: String,
    },

    /// Lever un remplacement
    ClearReplacement {
        #[arg(long)]
        caregiver: String,
        #[arg(long)]
        weekday: String,
    },

    /// Consulter le remplaçant actif d'un soignant pour un jour
    CheckReplacement {
        #[arg(long)]
        caregiver: String,
        #[arg(long)]
        weekday: String,
    },

    /// Déplacer un rendez-vous d'un soignant vers un autre
    Move {
        #[arg(long)]
        appointment: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Ignore le détour par un remplacement actif du destinataire
        #[arg(long)]
        literal: bool,
    },

    /// Transférer toute la tournée d'un soignant (tous jours)
    BatchMove {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Afficher la capacité (plafond/affecté/restant) d'un soignant
    Capacity {
        #[arg(long)]
        caregiver: String,
        /// aw_nursing, rb_nursing_weekend_day, ...
        #[arg(long)]
        duty_type: String,
        /// YYYY-MM
        #[arg(long)]
        month: String,
    },

    /// Affecter un créneau d'astreinte
    AssignDuty {
        #[arg(long)]
        slot: String,
        #[arg(long)]
        caregiver: String,
        /// Autorise le dépassement du plafond mensuel
        #[arg(long)]
        overplan: bool,
    },

    /// Libérer un créneau d'astreinte
    UnassignDuty {
        #[arg(long)]
        slot: String,
    },

    /// Générer la demande d'astreinte d'un mois (YYYY-MM)
    SeedMonth {
        #[arg(long)]
        month: String,
    },

    /// Planifier automatiquement les astreintes d'une période
    AutoPlan {
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end: String,
        /// Replanifie aussi les créneaux déjà tenus
        #[arg(long)]
        overwrite: bool,
        #[arg(long)]
        overplan: bool,
    },

    /// Supprimer toutes les affectations d'astreinte d'une période
    ResetPlanning {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },
}

fn resolve_handle(dispatcher: &Dispatcher, handle: &str) -> Result<CaregiverId> {
    dispatcher
        .caregivers()
        .iter()
        .find(|c| c.handle == handle)
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow!("unknown caregiver: {}", handle))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.plan)?;
    let plan = storage.load_or_default();

    let code = match cli.cmd {
        Commands::ImportCaregivers { csv } => {
            let mut plan = plan;
            let caregivers = io::import_caregivers_csv(csv)?;
            plan.caregivers.extend(caregivers);
            storage.save(&plan)?;
            0
        }
        Commands::ImportAppointments { csv } => {
            let mut plan = plan;
            let appointments = io::import_appointments_csv(csv, &plan)?;
            plan.appointments.extend(appointments);
            storage.save(&plan)?;
            0
        }
        Commands::SetReplacement {
            caregiver,
            weekday,
            with,
        } => {
            let dispatcher = Dispatcher::new(plan);
            let c = resolve_handle(&dispatcher, &caregiver)?;
            let r = resolve_handle(&dispatcher, &with)?;
            let day = io::parse_weekday(&weekday)?;
            let result = dispatcher.set_replacement(&c, day, &r)?;
            storage.save(&dispatcher.plan())?;
            println!("{} appointment(s) moved to {}", result.moved, with);
            0
        }
        Commands::ClearReplacement { caregiver, weekday } => {
            let dispatcher = Dispatcher::new(plan);
            let c = resolve_handle(&dispatcher, &caregiver)?;
            let day = io::parse_weekday(&weekday)?;
            let result = dispatcher.clear_replacement(&c, day)?;
            storage.save(&dispatcher.plan())?;
            println!("{} appointment(s) restored to {}", result.moved, caregiver);
            0
        }
        Commands::CheckReplacement { caregiver, weekday } => {
            let dispatcher = Dispatcher::new(plan);
            let c = resolve_handle(&dispatcher, &caregiver)?;
            let day = io::parse_weekday(&weekday)?;
            match dispatcher.check_replacement(&c, day) {
                Some(replacement) => {
                    let handle = dispatcher
                        .caregivers()
                        .iter()
                        .find(|x| x.id == replacement)
                        .map(|x| x.handle.clone())
                        .unwrap_or_else(|| replacement.as_str().to_string());
                    println!("replaced by {handle}");
                }
                None => println!("no replacement"),
            }
            0
        }
        Commands::Move {
            appointment,
            from,
            to,
            literal,
        } => {
            let dispatcher = Dispatcher::new(plan);
            let id = AppointmentId::new(appointment);
            let from = resolve_handle(&dispatcher, &from)?;
            let to = resolve_handle(&dispatcher, &to)?;
            let result = dispatcher.move_appointment(&id, &from, &to, !literal)?;
            storage.save(&dispatcher.plan())?;
            if result.redirected {
                println!("moved with redirect, final owner {}", result.final_owner);
            } else {
                println!("moved, final owner {}", result.final_owner);
            }
            0
        }
        Commands::BatchMove { from, to } => {
            let dispatcher = Dispatcher::new(plan);
            let from = resolve_handle(&dispatcher, &from)?;
            let to = resolve_handle(&dispatcher, &to)?;
            let count = dispatcher.batch_move_appointments(&from, &to)?;
            storage.save(&dispatcher.plan())?;
            println!("{count} appointment(s) moved");
            0
        }
        Commands::Capacity {
            caregiver,
            duty_type,
            month,
        } => {
            let dispatcher = Dispatcher::new(plan);
            let c = resolve_handle(&dispatcher, &caregiver)?;
            let duty_type = io::parse_duty_type(&duty_type)?;
            let month: MonthRef = month.parse().map_err(anyhow::Error::msg)?;
            let capacity = dispatcher.capacity(&c, duty_type, month)?;
            println!(
                "limit {} assigned {} remaining {}",
                capacity.limit, capacity.assigned, capacity.remaining
            );
            0
        }
        Commands::AssignDuty {
            slot,
            caregiver,
            overplan,
        } => {
            let dispatcher = Dispatcher::new(plan);
            let slot = SlotId::new(slot);
            let c = resolve_handle(&dispatcher, &caregiver)?;
            match dispatcher.assign_duty(&slot, &c, overplan) {
                Ok(capacity) => {
                    storage.save(&dispatcher.plan())?;
                    println!(
                        "assigned ({} remaining this month)",
                        capacity.remaining
                    );
                    0
                }
                // Refus métier, pas une panne : code 2 pour laisser le
                // dispatcheur décider de forcer avec --overplan.
                Err(err @ DispatchError::CapacityExceeded { .. }) => {
                    eprintln!("{err}");
                    2
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::UnassignDuty { slot } => {
            let dispatcher = Dispatcher::new(plan);
            dispatcher.unassign_duty(&SlotId::new(slot))?;
            storage.save(&dispatcher.plan())?;
            0
        }
        Commands::SeedMonth { month } => {
            let dispatcher = Dispatcher::new(plan);
            let month: MonthRef = month.parse().map_err(anyhow::Error::msg)?;
            let created = dispatcher.seed_month(month);
            storage.save(&dispatcher.plan())?;
            println!("{created} slot(s) created");
            0
        }
        Commands::AutoPlan {
            start,
            end,
            overwrite,
            overplan,
        } => {
            let dispatcher = Dispatcher::new(plan);
            let start: NaiveDate = start.parse()?;
            let end: NaiveDate = end.parse()?;
            let options = AutoPlanOptions {
                existing: if overwrite {
                    ExistingHandling::Overwrite
                } else {
                    ExistingHandling::Respect
                },
                allow_overplanning: overplan,
            };
            let cancel = AtomicBool::new(false);
            let report =
                dispatcher.auto_plan(start, end, options, &RotationSolver, &cancel)?;
            storage.save(&dispatcher.plan())?;
            println!(
                "planned {} slot(s), rejected {}, total planned in range {}",
                report.created, report.rejected, report.total_planned
            );
            0
        }
        Commands::ResetPlanning { start, end } => {
            let dispatcher = Dispatcher::new(plan);
            let start: NaiveDate = start.parse()?;
            let end: NaiveDate = end.parse()?;
            let cleared = dispatcher.reset_planning(start, end)?;
            storage.save(&dispatcher.plan())?;
            println!("{cleared} assignment(s) cleared");
            0
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_plan_json(path, &plan)?;
            }
            if let Some(path) = out_csv {
                io::export_duty_csv(path, &plan)?;
            }
            // impression compacte
            for a in &plan.appointments {
                let owner = plan
                    .find_caregiver_by_id(&a.owner)
                    .map(|c| c.handle.as_str())
                    .unwrap_or("-");
                println!(
                    "appt {} | {} {} | {}min | {}",
                    a.id.as_str(),
                    a.weekday,
                    a.patient,
                    a.duration_minutes,
                    owner
                );
            }
            for s in &plan.duty_slots {
                let assigned = s
                    .assigned
                    .as_ref()
                    .and_then(|cid| plan.find_caregiver_by_id(cid))
                    .map(|c| c.handle.as_str())
                    .unwrap_or("-");
                println!(
                    "slot {} | {} {} {} | {}",
                    s.id.as_str(),
                    s.date,
                    s.duty_type,
                    s.area,
                    assigned
                );
            }
            0
        }
    };

    std::process::exit(code);
}
