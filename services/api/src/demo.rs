use crate::infra::InMemoryListingBackend;
use clap::Args;
use listing_desk::config::AppConfig;
use listing_desk::error::AppError;
use listing_desk::listing::{
    DraftPatch, DraftSection, FileSnapshotStore, ListingDraft, ListingSubmitter, ListingWizard,
    MemorySnapshotStore, SnapshotStore, WizardStep,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Listing title used on the review step.
    #[arg(long, default_value = "Sunny 2 BHK near Baner")]
    pub(crate) title: String,
    /// Mirror the wizard into the configured draft directory instead of memory.
    #[arg(long)]
    pub(crate) persist: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DraftArgs {
    /// Directory holding the saved draft (defaults to DRAFT_STORAGE_DIR).
    #[arg(long)]
    pub(crate) dir: Option<PathBuf>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let backend = InMemoryListingBackend::default();
    println!("Listing wizard demo");

    let outcome = if args.persist {
        let store = FileSnapshotStore::new(AppConfig::load()?.storage.draft_dir);
        println!("Mirroring draft to {}", store.path().display());
        walk_wizard(ListingWizard::mount(store), &backend, &args.title).await?
    } else {
        walk_wizard(
            ListingWizard::mount(MemorySnapshotStore::default()),
            &backend,
            &args.title,
        )
        .await?
    };

    println!(
        "\nSubmitted listing {} ({} received by the backend)",
        outcome.text("id").unwrap_or("<unassigned>"),
        backend.received().len()
    );
    Ok(())
}

/// Answers for each step of a rental flat in Pune.
fn sample_answers(title: &str) -> Result<Vec<DraftPatch>, AppError> {
    let answers = vec![
        DraftPatch::from_json(json!({
            "context": { "listingType": "RENT", "category": "RESIDENTIAL" },
            "meta": { "title": title },
        }))?,
        DraftPatch::section(
            DraftSection::Location,
            json!({
                "cityId": "pune",
                "cityName": "Pune",
                "locality": "Baner",
                "lat": 18.559,
                "lng": 73.7868,
            }),
        )?,
        DraftPatch::section(
            DraftSection::Details,
            json!({ "builtUpArea": 950, "bedrooms": 2, "bathrooms": 2 }),
        )?,
        DraftPatch::section(DraftSection::Media, json!({ "imageIds": ["img-1", "img-2"] }))?,
        DraftPatch::section(
            DraftSection::Pricing,
            json!({ "amount": 32000, "negotiable": true }),
        )?,
        DraftPatch::from_json(json!({
            "amenities": { "furnishing": "SEMI_FURNISHED", "parking": ["COVERED"] },
            "availability": { "status": "READY_TO_MOVE" },
        }))?,
    ];
    Ok(answers)
}

/// Walks steps 1..6 with validated answers, then submits from review.
pub(crate) async fn walk_wizard<S, T>(
    mut wizard: ListingWizard<S>,
    submitter: &T,
    title: &str,
) -> Result<ListingDraft, AppError>
where
    S: SnapshotStore,
    T: ListingSubmitter + ?Sized,
{
    if wizard.step() != WizardStep::FIRST {
        println!(
            "Discarding saved draft at step {} ({})",
            wizard.step().number(),
            wizard.step().label()
        );
        wizard.reset();
    }

    for answers in sample_answers(title)? {
        let from = wizard.step();
        let to = wizard.continue_step(&answers)?;
        println!("- {} -> {}", from.label(), to.label());
    }

    wizard.submit(submitter).await?;
    println!("- {}: {}", wizard.step().label(), wizard.status().label());
    Ok(wizard.draft().clone())
}

fn draft_store(args: DraftArgs) -> Result<FileSnapshotStore, AppError> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => AppConfig::load()?.storage.draft_dir,
    };
    Ok(FileSnapshotStore::new(dir))
}

pub(crate) fn show_draft(args: DraftArgs) -> Result<(), AppError> {
    let store = draft_store(args)?;
    match store.load() {
        Some(snapshot) => {
            println!(
                "Saved draft at {} resumes at step {} ({})",
                store.path().display(),
                snapshot.step.number(),
                snapshot.step.label()
            );
            let form = snapshot.draft.to_json();
            println!(
                "{}",
                serde_json::to_string_pretty(&form).unwrap_or_else(|_| form.to_string())
            );
        }
        None => println!("No saved listing draft at {}", store.path().display()),
    }
    Ok(())
}

pub(crate) fn reset_draft(args: DraftArgs) -> Result<(), AppError> {
    let store = draft_store(args)?;
    store.clear();
    println!("Cleared saved listing draft at {}", store.path().display());
    Ok(())
}
