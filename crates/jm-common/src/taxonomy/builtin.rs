use super::{SkillCategory, SkillTerm};

use SkillCategory::{Hard, Language, Soft};

/// Built-in skill list: (id, label, category, aliases).
///
/// NOTE: bare forms that collide with ordinary words ("go", "es", "r") are not
/// aliases; the taxonomy also skips such short ids and labels, so only the
/// qualified spellings resolve.
const BUILTIN_TERMS: &[(&str, &str, SkillCategory, &[&str])] = &[
    // Programming languages
    ("python", "Python", Hard, &["python3", "python 3", "py", "python2.7"]),
    ("java", "Java", Hard, &["java8", "java11", "java17", "openjdk", "oracle java"]),
    ("javascript", "JavaScript", Hard, &["js", "java script", "ecmascript", "es6"]),
    ("typescript", "TypeScript", Hard, &["ts", "type script"]),
    ("csharp", "C#", Hard, &["c#", "c sharp", ".net", "dotnet"]),
    ("cplusplus", "C++", Hard, &["c++", "cpp", "c plus plus"]),
    ("golang", "Go", Hard, &["go lang", "go language"]),
    ("rust", "Rust", Hard, &["rust lang", "rust language", "rustlang"]),
    ("php", "PHP", Hard, &["php7", "php8"]),
    ("ruby", "Ruby", Hard, &["ruby lang", "ruby on rails", "rails"]),
    ("kotlin", "Kotlin", Hard, &["kotlin jvm"]),
    ("scala", "Scala", Hard, &["scala lang"]),
    ("r_lang", "R", Hard, &["r language", "langage r", "rstudio", "r studio"]),
    ("sql", "SQL", Hard, &["structured query language", "t-sql", "tsql", "pl/sql", "plsql"]),
    ("vba", "VBA", Hard, &["visual basic for applications", "excel vba"]),
    // Web frameworks
    ("react", "React", Hard, &["reactjs", "react.js", "react js"]),
    ("vue", "Vue.js", Hard, &["vue.js", "vuejs", "vue js"]),
    ("angular", "Angular", Hard, &["angularjs", "angular.js"]),
    ("nodejs", "Node.js", Hard, &["node.js", "node js", "node"]),
    ("django", "Django", Hard, &["django rest framework", "drf"]),
    ("flask", "Flask", Hard, &["python flask"]),
    ("fastapi", "FastAPI", Hard, &["fast api"]),
    ("spring", "Spring", Hard, &["spring boot", "springboot", "spring framework"]),
    // Databases
    ("postgresql", "PostgreSQL", Hard, &["postgres", "postgre sql"]),
    ("mysql", "MySQL", Hard, &["my sql", "mariadb"]),
    ("mongodb", "MongoDB", Hard, &["mongo", "mongo db"]),
    ("redis", "Redis", Hard, &[]),
    ("elasticsearch", "Elasticsearch", Hard, &["elastic search"]),
    ("oracle_db", "Oracle Database", Hard, &["oracle database", "oracle db"]),
    ("nosql", "NoSQL", Hard, &["no sql"]),
    // Cloud and infrastructure
    ("aws", "AWS", Hard, &["amazon web services", "amazon aws"]),
    ("gcp", "Google Cloud", Hard, &["google cloud platform", "google cloud"]),
    ("azure", "Azure", Hard, &["microsoft azure", "ms azure"]),
    ("docker", "Docker", Hard, &["docker container", "containerization", "conteneurisation"]),
    ("kubernetes", "Kubernetes", Hard, &["k8s", "kube"]),
    ("terraform", "Terraform", Hard, &["infrastructure as code"]),
    ("ansible", "Ansible", Hard, &[]),
    ("linux", "Linux", Hard, &["unix", "gnu/linux"]),
    ("git", "Git", Hard, &["github", "gitlab", "version control"]),
    ("cicd", "CI/CD", Hard, &["ci/cd", "continuous integration", "intégration continue", "jenkins"]),
    // Data engineering
    ("spark", "Apache Spark", Hard, &["apache spark", "pyspark", "spark streaming"]),
    ("hadoop", "Hadoop", Hard, &["apache hadoop", "hdfs"]),
    ("kafka", "Kafka", Hard, &["apache kafka"]),
    ("airflow", "Airflow", Hard, &["apache airflow"]),
    ("dbt", "dbt", Hard, &["data build tool"]),
    ("etl", "ETL", Hard, &["elt", "extract transform load"]),
    ("snowflake", "Snowflake", Hard, &[]),
    ("bigquery", "BigQuery", Hard, &["big query"]),
    ("databricks", "Databricks", Hard, &[]),
    // Data analysis and BI
    ("pandas", "pandas", Hard, &["python pandas"]),
    ("numpy", "NumPy", Hard, &["numerical python"]),
    ("excel", "Excel", Hard, &["microsoft excel", "ms excel"]),
    ("power_bi", "Power BI", Hard, &["power bi", "powerbi", "microsoft power bi"]),
    ("tableau", "Tableau", Hard, &["tableau software"]),
    ("looker", "Looker", Hard, &["looker studio", "google data studio"]),
    ("qlik", "Qlik", Hard, &["qlikview", "qlik sense"]),
    ("sas", "SAS", Hard, &[]),
    ("statistics", "Statistics", Hard, &["statistiques", "statistical analysis", "analyse statistique"]),
    ("data_visualization", "Data visualization", Hard, &["data visualisation", "dataviz", "data viz", "visualisation de données"]),
    ("data_analysis", "Data analysis", Hard, &["analyse de données", "data analytics"]),
    // Machine learning
    ("machine_learning", "Machine learning", Hard, &["machine learning", "ml", "apprentissage automatique"]),
    ("deep_learning", "Deep learning", Hard, &["deep learning", "neural networks", "réseaux de neurones"]),
    ("nlp", "NLP", Hard, &["natural language processing", "traitement du langage naturel"]),
    ("llm", "LLM", Hard, &["large language model", "large language models", "llms", "generative ai", "ia générative"]),
    ("tensorflow", "TensorFlow", Hard, &["tensor flow"]),
    ("pytorch", "PyTorch", Hard, &["torch", "py torch"]),
    ("scikit_learn", "scikit-learn", Hard, &["scikit-learn", "scikit learn", "sklearn"]),
    // Practices
    ("agile", "Agile", Hard, &["scrum", "kanban", "méthodes agiles", "agile methodology"]),
    ("rest_api", "REST APIs", Hard, &["rest api", "rest apis", "api rest", "restful"]),
    ("microservices", "Microservices", Hard, &["micro services", "micro-services"]),
    // Soft skills
    ("communication", "Communication", Soft, &["communication skills", "aisance relationnelle"]),
    ("teamwork", "Teamwork", Soft, &["team work", "team player", "travail en équipe", "esprit d'équipe", "collaboration"]),
    ("autonomy", "Autonomy", Soft, &["autonomie", "autonomous", "autonome", "self-starter"]),
    ("rigor", "Rigor", Soft, &["rigour", "rigueur", "rigoureux", "attention to detail"]),
    ("analytical_thinking", "Analytical thinking", Soft, &["analytical skills", "esprit d'analyse", "capacité d'analyse", "esprit analytique"]),
    ("problem_solving", "Problem solving", Soft, &["problem-solving", "résolution de problèmes"]),
    ("leadership", "Leadership", Soft, &["team leadership"]),
    ("adaptability", "Adaptability", Soft, &["adaptabilité", "capacité d'adaptation", "flexibility"]),
    ("organization", "Organization", Soft, &["organisation", "sens de l'organisation", "organizational skills"]),
    ("curiosity", "Curiosity", Soft, &["curiosité", "curious", "curieux"]),
    ("creativity", "Creativity", Soft, &["créativité", "creative thinking"]),
    ("time_management", "Time management", Soft, &["gestion du temps", "gestion des priorités"]),
    // Spoken languages
    ("english", "English", Language, &["anglais", "anglais courant", "fluent english", "business english", "anglais professionnel"]),
    ("french", "French", Language, &["français", "francais", "french speaker", "francophone"]),
    ("german", "German", Language, &["allemand"]),
    ("spanish", "Spanish", Language, &["espagnol"]),
    ("italian", "Italian", Language, &["italien"]),
    ("portuguese", "Portuguese", Language, &["portugais"]),
    ("dutch", "Dutch", Language, &["néerlandais"]),
    ("arabic", "Arabic", Language, &["arabe"]),
    ("mandarin", "Mandarin", Language, &["chinois", "chinese", "mandarin chinese"]),
    ("japanese", "Japanese", Language, &["japonais"]),
];

pub(super) fn builtin_terms() -> Vec<SkillTerm> {
    BUILTIN_TERMS
        .iter()
        .map(|(id, label, category, aliases)| {
            SkillTerm::new(*id, *label, *category).with_aliases(aliases.iter().copied())
        })
        .collect()
}
