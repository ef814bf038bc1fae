//! The `learnlens init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("learnlens.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("data")?;
    write_if_missing(Path::new("data/students.csv"), SAMPLE_STUDENTS)?;
    write_if_missing(Path::new("data/assessments.csv"), SAMPLE_ASSESSMENTS)?;
    write_if_missing(Path::new("data/study_sessions.csv"), SAMPLE_SESSIONS)?;

    println!("\nNext steps:");
    println!("  1. Run: learnlens validate --data data");
    println!("  2. Run: learnlens student --id STU001 --format all");
    println!("  3. Run: learnlens batch");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# learnlens configuration

data_dir = "./data"
output_dir = "./learnlens-reports"
parallelism = 4

[analyzer]
weak_threshold = 70.0
strong_threshold = 85.0
top_n = 5
trend_min_points = 5
prediction_min_points = 3
prediction_window = 5
max_skill_gap_topics = 3
completion_rate_floor = 0.7
min_avg_time_minutes = 20.0
"#;

const SAMPLE_STUDENTS: &str = "\
student_id,name,grade_level,base_ability,learning_rate,engagement_level,study_hours_per_week
STU001,Ava Martin,10,,,,8
STU002,Ben Okafor,11,,,,3
STU003,Chloe Reyes,9,,,,10
STU004,Dev Sharma,12,,,,2
";

const SAMPLE_ASSESSMENTS: &str = "\
student_id,subject,topic,assessment_date,score,max_score,time_spent_minutes,attempts,difficulty_level
STU001,Mathematics,Algebra,2025-09-01 10:00:00,58.0,100,35,1,Medium
STU001,Science,Physics,2025-09-03 10:00:00,74.0,100,40,1,Medium
STU001,Mathematics,Algebra,2025-09-08 10:00:00,63.0,100,30,2,Medium
STU001,Mathematics,Geometry,2025-09-15 10:00:00,67.0,100,45,1,Hard
STU001,Science,Chemistry,2025-09-17 10:00:00,79.0,100,38,1,Medium
STU001,Mathematics,Geometry,2025-09-22 10:00:00,72.0,100,40,1,Hard
STU001,Mathematics,Algebra,2025-09-29 10:00:00,78.0,100,32,1,Medium
STU001,Science,Physics,2025-10-01 10:00:00,81.0,100,36,1,Medium
STU001,Mathematics,Geometry,2025-10-06 10:00:00,83.0,100,42,1,Hard
STU002,Mathematics,Algebra,2025-09-02 11:00:00,62.0,100,15,1,Easy
STU002,English,Grammar,2025-09-04 11:00:00,71.0,100,18,1,Easy
STU002,Mathematics,Calculus,2025-09-09 11:00:00,55.0,100,12,2,Hard
STU002,Mathematics,Algebra,2025-09-16 11:00:00,60.0,100,14,1,Medium
STU002,English,Writing,2025-09-18 11:00:00,68.0,100,16,1,Medium
STU002,Mathematics,Calculus,2025-09-23 11:00:00,52.0,100,13,3,Hard
STU003,Science,Biology,2025-09-02 09:00:00,91.0,100,35,1,Medium
STU003,English,Literature,2025-09-05 09:00:00,86.0,100,30,1,Medium
STU003,Science,Chemistry,2025-09-12 09:00:00,88.0,100,40,1,Hard
STU003,History,World History,2025-09-19 09:00:00,89.0,100,33,1,Medium
STU003,English,Writing,2025-09-26 09:00:00,90.0,100,37,1,Medium
STU003,Science,Biology,2025-10-03 09:00:00,94.0,100,34,1,Hard
";

const SAMPLE_SESSIONS: &str = "\
student_id,session_date,subject,duration_minutes,completed
STU001,2025-09-01 18:00:00,Mathematics,45,True
STU001,2025-09-07 18:00:00,Science,60,True
STU001,2025-09-14 18:00:00,Mathematics,30,False
STU001,2025-09-21 18:00:00,Mathematics,50,True
STU002,2025-09-03 19:00:00,Mathematics,20,False
STU002,2025-09-10 19:00:00,English,25,False
STU002,2025-09-17 19:00:00,Mathematics,30,True
STU003,2025-09-04 17:00:00,Science,55,True
STU003,2025-09-11 17:00:00,English,40,True
STU004,2025-09-05 20:00:00,History,15,False
";
