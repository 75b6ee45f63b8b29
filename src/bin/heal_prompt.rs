use std::env;

use candle_core::Device;
use token_healer::{GgufGenerator, HealConfig, TokenHealer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <model_id@file.gguf> <prompt> [tokenizer_source]",
            args[0]
        );
        std::process::exit(1);
    }

    let model_id = &args[1];
    let prompt = &args[2];
    let tokenizer_source = args.get(3).map(|s| s.as_str());

    let config = HealConfig::default();
    let device = Device::Cpu;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let generator = runtime.block_on(GgufGenerator::from_pretrained(
        model_id,
        device,
        tokenizer_source,
        &config,
    ))?;

    let tokenizer = generator.clone_tokenizer();
    let mut healer = TokenHealer::new(tokenizer, generator, config)?;

    println!("prompt: {prompt:?}");
    let healed = healer.heal_or_keep(prompt);
    println!("healed: {healed:?}");

    Ok(())
}
