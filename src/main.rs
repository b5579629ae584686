use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser as ClapParser;
use flatview::{Decoder, DecoderOptions, Endian, TableLayout};

/// Prints the vtable layout of a table in a FlatBuffers-layout buffer.
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    input: PathBuf,

    #[arg(long)]
    big_endian: bool,

    /// The buffer starts with a u32 byte length.
    #[arg(long)]
    size_prefixed: bool,

    /// Fail unless the 4 byte file identifier matches.
    #[arg(long)]
    identifier: Option<String>,

    /// Position of a table's offset slot, defaults to the root slot.
    #[arg(long)]
    table_at: Option<usize>,
}

fn print_layout(layout: &TableLayout) {
    println!("instance start: {}", layout.instance_start);
    println!("vtable offset:  {}", layout.vtable_offset);
    match layout.vtable.object_size() {
        Some(size) => println!("object size:    {}", size),
        None => println!("object size:    -"),
    }
    for (slot, offset) in layout.vtable.fields() {
        match offset {
            Some(offset) => println!("  slot {:>3}: +{}", slot, offset),
            None => println!("  slot {:>3}: absent", slot),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut file = std::fs::File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let buf = flatview::read_buffer(&mut file)?;

    let endian = if args.big_endian {
        Endian::Big
    } else {
        Endian::Little
    };
    let options = DecoderOptions::default()
        .with_endian(endian)
        .with_size_prefix(args.size_prefixed);
    let mut decoder = Decoder::with_options(&buf, options);

    if let Some(size) = decoder.size_prefix()? {
        println!("size prefix:    {}", size);
    }
    if let Some(identifier) = &args.identifier {
        let Ok(expected) = <[u8; 4]>::try_from(identifier.as_bytes()) else {
            bail!("file identifier must be 4 bytes, got {:?}", identifier);
        };
        decoder.check_identifier(&expected)?;
    } else if let Some(found) = decoder.file_identifier() {
        println!("identifier:     {:?}", String::from_utf8_lossy(&found));
    }

    let slot = match args.table_at {
        Some(pos) => pos,
        None if args.size_prefixed => 4,
        None => 0,
    };
    decoder.seek(slot);
    let layout = decoder
        .inspect_table()
        .with_context(|| format!("reading table at slot {}", slot))?;
    print_layout(&layout);
    Ok(())
}
