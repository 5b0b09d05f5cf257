// End-to-end tests: sense store on disk, country corpus, batch and single generation
use mcq_core::{
    add_sense, check_choice, extract::extractor_from_config, init_store, parse_file,
    relevant_question, sentences::RuleSentencizer, ExtractionConfig, Gazetteer, Generator,
    GeneratorConfig, MultipleChoice, SenseKey, SenseVectors,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::Path;

const ABSTRACT: &str = "Peru is a country in South America. It borders Ecuador and Colombia. \
    Lima is the capital of Peru. Bolivar freed Peru from Spain. The Andes cross the country.";

fn build_store(path: &Path) {
    let conn = init_store(path).unwrap();
    let senses: &[(&str, i64, [f32; 3])] = &[
        ("peru|GPE", 100, [1.0, 0.0, 0.0]),
        ("chile|GPE", 80, [0.95, 0.05, 0.0]),
        ("ecuador|GPE", 60, [0.9, 0.1, 0.0]),
        ("colombia|GPE", 70, [0.88, 0.12, 0.0]),
        ("bolivia|GPE", 50, [0.85, 0.15, 0.0]),
        ("peruvian_republic|GPE", 5, [0.99, 0.01, 0.0]),
        ("spain|GPE", 90, [0.6, 0.4, 0.0]),
        ("lima|GPE", 40, [0.7, 0.0, 0.3]),
        ("bolivar|PERSON", 30, [0.0, 0.0, 1.0]),
        ("san_martin|PERSON", 20, [0.0, 0.1, 0.95]),
        ("sucre|PERSON", 15, [0.0, 0.2, 0.9]),
        ("tupac_amaru|PERSON", 10, [0.0, 0.15, 0.98]),
        ("bolivar|GPE", 2, [0.5, 0.5, 0.5]),
    ];
    for (key, freq, vector) in senses {
        add_sense(&conn, &SenseKey::parse(key).unwrap(), *freq, vector).unwrap();
    }
}

fn write_corpus(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "country_name,country_abstract").unwrap();
    writeln!(file, "Peru,\"{}\"", ABSTRACT).unwrap();
    writeln!(file, "Chile,\"Chile is long and narrow.\"").unwrap();
}

fn generator(dir: &Path, config: GeneratorConfig) -> Generator {
    let store = dir.join("senses.db");
    build_store(&store);
    let corpus = dir.join("countries.csv");
    write_corpus(&corpus);

    let countries = parse_file(&corpus).unwrap();
    let mut gazetteer: Gazetteer = [
        ("Bolivar", "PERSON"),
        ("Ecuador", "GPE"),
        ("Colombia", "GPE"),
        ("Spain", "GPE"),
        ("Lima", "GPE"),
    ]
    .into_iter()
    .collect();
    mcq_core::corpus::extend_gazetteer(&mut gazetteer, &countries);

    let similarity = SenseVectors::open(&store).unwrap();
    let extractor = extractor_from_config(&config.extraction, Box::new(gazetteer));
    Generator::new(Box::new(similarity), extractor, config)
}

#[test]
fn test_batch_questions_hold_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let generator = generator(dir.path(), GeneratorConfig::default());
    let sentences = RuleSentencizer::new().split_sentences(ABSTRACT);

    let mut rng = StdRng::seed_from_u64(2024);
    let questions = generator.generate_mcq(ABSTRACT, &mut rng).unwrap();
    assert!(!questions.is_empty());

    for q in &questions {
        assert_eq!(q.distractors.len(), 3);
        assert_eq!(q.sentence.matches("<blank>").count(), 1);
        let restored = q.sentence.replacen("<blank>", &q.answer, 1);
        assert!(sentences.contains(&restored), "{restored}");
        for d in &q.distractors {
            let d = d.to_lowercase();
            let a = q.answer.to_lowercase();
            assert!(!d.contains(&a) && !a.contains(&d), "{d} collides with {a}");
        }
    }

    // "Peru" occurs in three sentences and always has enough neighbours
    assert_eq!(questions.iter().filter(|q| q.answer == "Peru").count(), 3);
    // Bolivar resolves to its more frequent PERSON sense
    assert!(questions.iter().any(|q| q.answer == "Bolivar"));
}

#[test]
fn test_batch_order_follows_sentences() {
    let dir = tempfile::tempdir().unwrap();
    let generator = generator(dir.path(), GeneratorConfig::default());
    let sentences = RuleSentencizer::new().split_sentences(ABSTRACT);

    let mut rng = StdRng::seed_from_u64(1);
    let questions = generator.generate_mcq(ABSTRACT, &mut rng).unwrap();
    let positions: Vec<usize> = questions
        .iter()
        .map(|q| {
            let restored = q.sentence.replacen("<blank>", &q.answer, 1);
            sentences.iter().position(|s| *s == restored).unwrap()
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_single_question_and_grading() {
    let dir = tempfile::tempdir().unwrap();
    let generator = generator(dir.path(), GeneratorConfig::default());

    let mut rng = StdRng::seed_from_u64(77);
    let question = generator.generate_single_mcq(ABSTRACT, &mut rng).unwrap().unwrap();
    assert_eq!(question.distractors.len(), 3);

    let choice = MultipleChoice::from_question(&question, &mut rng);
    assert!(check_choice(&choice, choice.correct_index).unwrap().is_correct);
}

#[test]
fn test_single_question_none_when_nothing_recognized() {
    let dir = tempfile::tempdir().unwrap();
    let generator = generator(dir.path(), GeneratorConfig::default());

    let mut rng = StdRng::seed_from_u64(3);
    let result = generator
        .generate_single_mcq("The Andes are high. Rivers run east.", &mut rng)
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_relevant_question_avoids_topic_country() {
    let dir = tempfile::tempdir().unwrap();
    let generator = generator(dir.path(), GeneratorConfig::default());

    let mut rng = StdRng::seed_from_u64(8);
    let questions = generator.generate_mcq(ABSTRACT, &mut rng).unwrap();
    for _ in 0..10 {
        let q = relevant_question(&questions, "peru", &mut rng).unwrap();
        assert_ne!(q.answer, "Peru");
    }
}

#[test]
fn test_custom_placeholder_and_count() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig::from_json_str(r#"{"placeholder": "____", "distractor_count": 2}"#).unwrap();
    let generator = generator(dir.path(), config);

    let mut rng = StdRng::seed_from_u64(5);
    let questions = generator.generate_mcq("Bolivar freed Peru from Spain.", &mut rng).unwrap();
    assert!(!questions.is_empty());
    for q in &questions {
        assert_eq!(q.distractors.len(), 2);
        assert!(q.sentence.contains("____"));
    }
}

#[test]
fn test_keyphrase_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        extraction: ExtractionConfig::Keyphrases { top_n: 20 },
        ..Default::default()
    };
    let generator = generator(dir.path(), config);

    let mut rng = StdRng::seed_from_u64(6);
    // which phrases get questions depends on the ranking, check shape only
    let questions = generator.generate_mcq(ABSTRACT, &mut rng).unwrap();
    for q in &questions {
        assert_eq!(q.distractors.len(), 3);
        assert_eq!(q.sentence.matches("<blank>").count(), 1);
    }
}
