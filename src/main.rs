//! cake - sample relation-aware batches from a triplet file and report them.
//!
//! Usage: cake <train.json[,train2.json..]> <entities.json> <commonsense_dir> [config.json]

use std::env;
use std::sync::Arc;

use cake::data::{read_triplets, split_paths};
use cake::{
    collate_grouped, DataConfig, DataHub, Dataset, EntityDict, RelationBatchSampler, Result,
    VocabTokenizer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: {} <train.json[,..]> <entities.json> <commonsense_dir> [config.json]",
            args.first().map(String::as_str).unwrap_or("cake")
        );
        std::process::exit(2);
    }

    if let Err(e) = run(&args[1], &args[2], &args[3], args.get(4).map(String::as_str)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(train: &str, entities: &str, commonsense_dir: &str, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => DataConfig::from_json_file(path)?,
        None => DataConfig::default(),
    };
    let train_paths = split_paths(train);

    // Vocabulary over entity names, descriptions and relation words
    let entity_dict = EntityDict::load(entities)?;
    let mut corpus = String::from("inverse ");
    for entity in entity_dict.iter() {
        corpus.push_str(&entity.entity);
        corpus.push(' ');
        corpus.push_str(&entity.entity_desc);
        corpus.push(' ');
    }
    for path in &train_paths {
        for triplet in read_triplets(path)? {
            corpus.push_str(&triplet.relation);
            corpus.push(' ');
        }
    }
    let tokenizer = VocabTokenizer::from_text(&corpus, config.max_num_tokens);
    info!(vocab = tokenizer.vocab_size(), "Built vocabulary");

    let hub = Arc::new(DataHub::load(config.clone(), entities, &train_paths, Arc::new(tokenizer))?);
    let dataset = Dataset::load(&train_paths, Arc::clone(&hub))?;
    let sampler = RelationBatchSampler::from_config(&config, commonsense_dir, dataset.info())?;

    println!(
        "{} examples, {} relations, {} batches of {}",
        dataset.len(),
        sampler.info().num_relations(),
        sampler.len(),
        sampler.batch_size()
    );

    for (step, indices) in sampler.iter().enumerate() {
        let indices = indices?;
        let vectorized = dataset.get_batch(&indices)?;
        let batch = collate_grouped(&[vectorized], &hub)?;

        let relations: std::collections::BTreeSet<&str> =
            batch.batch_data.iter().map(|ex| ex.relation.as_str()).collect();
        println!(
            "batch {:>4}: {} examples, {} relations, hr {:?}, tail {:?}",
            step,
            batch.len(),
            relations.len(),
            batch.hr_token_ids.dims(),
            batch.tail_token_ids.dims()
        );
    }
    Ok(())
}
